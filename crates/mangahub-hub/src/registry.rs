use std::collections::HashMap;

use crate::client::{Client, ClientId};

/// The set of live clients. Owned by the hub task alone; never shared.
#[derive(Default)]
pub(crate) struct Registry {
    clients: HashMap<ClientId, Client>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the client back if its id is already present.
    pub(crate) fn insert(&mut self, client: Client) -> Result<(), Client> {
        if self.clients.contains_key(&client.id()) {
            return Err(client);
        }
        self.clients.insert(client.id(), client);
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: &ClientId) -> Option<Client> {
        self.clients.remove(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.clients.len()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Client> {
        self.clients.values_mut()
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = Client> + '_ {
        self.clients.drain().map(|(_, client)| client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Sink;
    use crate::error::SinkError;

    struct NullSink;

    #[async_trait::async_trait]
    impl Sink for NullSink {
        async fn send(&mut self, _payload: &str) -> Result<(), SinkError> {
            Ok(())
        }
        async fn close(&mut self) {}
    }

    #[test]
    fn same_user_id_gives_distinct_entries() {
        let mut reg = Registry::new();
        reg.insert(Client::new("u1", "alice", NullSink)).unwrap();
        reg.insert(Client::new("u1", "alice", NullSink)).unwrap();
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn remove_missing_is_none() {
        let mut reg = Registry::new();
        let client = Client::new("u1", "alice", NullSink);
        let id = client.id();
        reg.insert(client).unwrap();
        assert!(reg.remove(&id).is_some());
        assert!(reg.remove(&id).is_none());
        assert_eq!(reg.len(), 0);
    }

    #[test]
    fn drain_empties_registry() {
        let mut reg = Registry::new();
        for i in 0..3 {
            reg.insert(Client::new(format!("u{i}"), "x", NullSink)).unwrap();
        }
        assert_eq!(reg.drain().count(), 3);
        assert_eq!(reg.len(), 0);
    }
}
