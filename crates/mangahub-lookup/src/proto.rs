//! Generated `mangahub.lookup` messages and service stubs.

#![allow(clippy::default_trait_access)]
#![allow(clippy::doc_markdown)]

use mangahub_catalog::Manga;

tonic::include_proto!("mangahub.lookup");

impl From<Manga> for MangaRecord {
    fn from(m: Manga) -> Self {
        Self {
            id: m.id,
            title: m.title,
            author: m.author,
            genres: m.genres,
            status: m.status,
            total_chapters: m.total_chapters,
            chapter: m.chapter,
            description: m.description,
        }
    }
}

impl From<MangaRecord> for Manga {
    fn from(r: MangaRecord) -> Self {
        Self {
            id: r.id,
            title: r.title,
            author: r.author,
            genres: r.genres,
            status: r.status,
            total_chapters: r.total_chapters,
            chapter: r.chapter,
            description: r.description,
        }
    }
}
