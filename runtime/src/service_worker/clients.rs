//! Clients API
//!
//! Pages (window clients) of the origin, and which worker controls them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use spin::RwLock;

use super::{ServiceWorkerError, ServiceWorkerId};

/// Client ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client#{}", self.0)
    }
}

/// Client type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientType {
    /// Window client
    #[default]
    Window,
    /// Worker client
    Worker,
    /// All types
    All,
}

/// Client info
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    /// Client ID
    pub id: ClientId,
    /// Client type
    pub client_type: ClientType,
    /// URL
    pub url: String,
    /// Whether focused
    pub focused: bool,
    /// Worker controlling this client
    pub controller: Option<ServiceWorkerId>,
}

/// Options for [`Clients::match_all`]
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchAllOptions {
    /// Include clients not controlled by the asking worker
    pub include_uncontrolled: bool,
    /// Client type filter
    pub client_type: ClientType,
}

#[derive(Default)]
struct ClientsInner {
    clients: RwLock<Vec<ClientInfo>>,
    next_id: AtomicU64,
}

/// Shared handle to the origin's clients.
#[derive(Clone, Default)]
pub struct Clients {
    inner: Arc<ClientsInner>,
}

impl Clients {
    /// Create an empty client list
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an open page
    pub fn add(&self, url: impl Into<String>) -> ClientId {
        let id = self.next_id();
        self.inner.clients.write().push(ClientInfo {
            id,
            client_type: ClientType::Window,
            url: url.into(),
            focused: false,
            controller: None,
        });
        id
    }

    fn next_id(&self) -> ClientId {
        ClientId(self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Forget a closed page
    pub fn remove(&self, id: ClientId) -> bool {
        let mut clients = self.inner.clients.write();
        let len_before = clients.len();
        clients.retain(|c| c.id != id);
        clients.len() != len_before
    }

    /// Get a client by ID
    pub fn get(&self, id: ClientId) -> Option<ClientInfo> {
        self.inner.clients.read().iter().find(|c| c.id == id).cloned()
    }

    /// Number of open clients
    pub fn len(&self) -> usize {
        self.inner.clients.read().len()
    }

    /// Whether no client is open
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clients visible to `worker`
    pub fn match_all(&self, worker: ServiceWorkerId, options: MatchAllOptions) -> Vec<ClientInfo> {
        self.inner
            .clients
            .read()
            .iter()
            .filter(|client| {
                options.client_type == ClientType::All || client.client_type == options.client_type
            })
            .filter(|client| options.include_uncontrolled || client.controller == Some(worker))
            .cloned()
            .collect()
    }

    /// Make `worker` the controller of every open client.
    ///
    /// Returns how many clients changed controller.
    pub fn claim(&self, worker: ServiceWorkerId) -> usize {
        let mut claimed = 0;
        for client in self.inner.clients.write().iter_mut() {
            if client.controller != Some(worker) {
                client.controller = Some(worker);
                claimed += 1;
            }
        }
        log::debug!("{}: claimed {} client(s)", worker, claimed);
        claimed
    }

    /// Set the controller of a single client
    pub fn set_controller(&self, id: ClientId, worker: Option<ServiceWorkerId>) -> Result<(), ServiceWorkerError> {
        let mut clients = self.inner.clients.write();
        let client = clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ServiceWorkerError::ClientNotFound(id))?;
        client.controller = worker;
        Ok(())
    }

    /// Focus a client, unfocusing all others
    pub fn focus(&self, id: ClientId) -> Result<ClientInfo, ServiceWorkerError> {
        let mut clients = self.inner.clients.write();
        if !clients.iter().any(|c| c.id == id) {
            return Err(ServiceWorkerError::ClientNotFound(id));
        }
        let mut focused = None;
        for client in clients.iter_mut() {
            client.focused = client.id == id;
            if client.focused {
                focused = Some(client.clone());
            }
        }
        focused.ok_or(ServiceWorkerError::ClientNotFound(id))
    }

    /// Open a new focused window at `url`
    pub fn open_window(&self, url: &str, controller: Option<ServiceWorkerId>) -> ClientInfo {
        let client = ClientInfo {
            id: self.next_id(),
            client_type: ClientType::Window,
            url: url.to_string(),
            focused: true,
            controller,
        };
        let mut clients = self.inner.clients.write();
        for other in clients.iter_mut() {
            other.focused = false;
        }
        clients.push(client.clone());
        client
    }

    /// The focused client, if any
    pub fn focused(&self) -> Option<ClientInfo> {
        self.inner.clients.read().iter().find(|c| c.focused).cloned()
    }
}
