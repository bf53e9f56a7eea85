//! `GetManga` / `SearchManga` over a real loopback gRPC connection.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mangahub_catalog::CatalogStore;
use mangahub_lookup::{LookupClient, LookupError, LookupServer};
use rusqlite::Connection;

fn seeded() -> CatalogStore {
    let conn = Connection::open_in_memory().unwrap();
    mangahub_catalog::db::init_db(&conn).unwrap();
    conn.execute_batch(
        r#"INSERT INTO manga VALUES
             ('one-piece', 'One Piece', 'Eiichiro Oda', '["Action","Adventure"]',
              'Ongoing', 1100, 1090, 'Pirates.');
           INSERT INTO manga (id, title) VALUES ('chainsaw-man', 'Chainsaw Man');
           INSERT INTO manga (id) VALUES ('bare');"#,
    )
    .unwrap();
    CatalogStore::new(conn).unwrap()
}

async fn start() -> (SocketAddr, LookupClient) {
    let server = LookupServer::bind("127.0.0.1:0".parse().unwrap(), Arc::new(seeded()))
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    let client = LookupClient::connect_lazy(addr, Duration::from_secs(2)).unwrap();
    (addr, client)
}

#[tokio::test]
async fn get_by_exact_id() {
    let (_, client) = start().await;
    let manga = client.get_manga("one-piece").await.unwrap();
    assert_eq!(manga.title, "One Piece");
    assert_eq!(manga.author, "Eiichiro Oda");
    assert_eq!(manga.genres, vec!["Action", "Adventure"]);
    assert_eq!(manga.total_chapters, 1100);
    assert_eq!(manga.chapter, 1090);
}

#[tokio::test]
async fn get_falls_back_to_title_match() {
    let (_, client) = start().await;
    let manga = client.get_manga("chainsaw man").await.unwrap();
    assert_eq!(manga.id, "chainsaw-man");
}

#[tokio::test]
async fn null_columns_cross_the_wire_as_empty() {
    let (_, client) = start().await;
    let manga = client.get_manga("bare").await.unwrap();
    assert_eq!(manga.title, "");
    assert!(manga.genres.is_empty());
    assert_eq!(manga.total_chapters, 0);
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let (_, client) = start().await;
    let err = client.get_manga("berserk").await.unwrap_err();
    assert!(matches!(err, LookupError::NotFound(ref id) if id == "berserk"));
}

#[tokio::test]
async fn search_returns_matches_in_id_order() {
    let (_, client) = start().await;
    let ids: Vec<String> = client
        .search_manga("an")
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, vec!["chainsaw-man"]);

    assert!(client.search_manga("zzz").await.unwrap().is_empty());
    assert_eq!(client.search_manga("").await.unwrap().len(), 3);
}

#[tokio::test]
async fn unreachable_service_is_a_call_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = LookupClient::connect_lazy(addr, Duration::from_millis(500)).unwrap();
    let err = client.get_manga("one-piece").await.unwrap_err();
    assert!(!matches!(err, LookupError::NotFound(_)));
}

#[tokio::test]
async fn bind_conflict_is_reported() {
    let (addr, _client) = start().await;
    let err = LookupServer::bind(addr, Arc::new(seeded())).await.err().unwrap();
    assert!(matches!(err, LookupError::Bind { .. }));
}
