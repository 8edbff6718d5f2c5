use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::WalletSettings;
use crate::error::WalletError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected { address: String, connected_at: DateTime<Utc> },
}

impl ConnectionState {
    pub fn address(&self) -> Option<&str> {
        match self {
            ConnectionState::Connected { address, .. } => Some(address),
            _ => None,
        }
    }
}

/// Wallet capability the rest of the platform depends on. Implementations
/// publish every state change to `subscribe()` receivers.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Single-shot connect; resolves to the connected account address.
    async fn connect(&self) -> Result<String, WalletError>;

    async fn disconnect(&self);

    fn state(&self) -> ConnectionState;

    fn subscribe(&self) -> watch::Receiver<ConnectionState>;

    fn address(&self) -> Result<String, WalletError> {
        self.state()
            .address()
            .map(str::to_string)
            .ok_or(WalletError::NotConnected)
    }
}

/// Shared connect/disconnect bookkeeping over a watch channel.
///
/// `attempt` identifies the connect that owns the current `Connecting` state.
/// It is only read or bumped inside `send_if_modified`, under the channel lock.
#[derive(Debug)]
struct ConnectionCell {
    tx: watch::Sender<ConnectionState>,
    attempt: AtomicU64,
}

enum ConnectStart {
    Started(u64),
    AlreadyConnected(String),
}

impl ConnectionCell {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(ConnectionState::Disconnected);
        Self {
            tx,
            attempt: AtomicU64::new(0),
        }
    }

    fn begin(&self) -> Result<ConnectStart, WalletError> {
        let mut outcome = Err(WalletError::AlreadyConnecting);
        self.tx.send_if_modified(|state| match state {
            ConnectionState::Disconnected => {
                *state = ConnectionState::Connecting;
                let attempt = self.attempt.fetch_add(1, Ordering::SeqCst) + 1;
                outcome = Ok(ConnectStart::Started(attempt));
                true
            }
            ConnectionState::Connected { address, .. } => {
                outcome = Ok(ConnectStart::AlreadyConnected(address.clone()));
                false
            }
            ConnectionState::Connecting => false,
        });
        outcome
    }

    /// Settles `attempt`. A disconnect since `begin` fails it even if a newer
    /// connect is already pending.
    fn finish(&self, attempt: u64, result: Result<String, WalletError>) -> Result<String, WalletError> {
        let mut outcome = Err(WalletError::ConnectionFailed {
            reason: "disconnected while connecting".to_string(),
        });
        self.tx.send_if_modified(|state| {
            if *state != ConnectionState::Connecting || self.attempt.load(Ordering::SeqCst) != attempt {
                return false;
            }
            match &result {
                Ok(address) => {
                    *state = ConnectionState::Connected {
                        address: address.clone(),
                        connected_at: Utc::now(),
                    };
                }
                Err(_) => *state = ConnectionState::Disconnected,
            }
            outcome = result.clone();
            true
        });
        outcome
    }

    fn reset(&self) -> bool {
        self.tx.send_if_modified(|state| {
            if *state == ConnectionState::Disconnected {
                return false;
            }
            self.attempt.fetch_add(1, Ordering::SeqCst);
            *state = ConnectionState::Disconnected;
            true
        })
    }
}

/// Stand-in for a browser wallet: waits for the configured delay and then
/// connects with a fixed address.
#[derive(Debug)]
pub struct SimulatedWallet {
    cell: ConnectionCell,
    delay: Duration,
    address: String,
}

impl SimulatedWallet {
    pub fn new(settings: &WalletSettings) -> Self {
        Self {
            cell: ConnectionCell::new(),
            delay: Duration::from_millis(settings.connect_delay_ms),
            address: settings.simulated_address.clone(),
        }
    }
}

#[async_trait]
impl WalletProvider for SimulatedWallet {
    async fn connect(&self) -> Result<String, WalletError> {
        let attempt = match self.cell.begin()? {
            ConnectStart::Started(attempt) => attempt,
            ConnectStart::AlreadyConnected(address) => return Ok(address),
        };

        tokio::time::sleep(self.delay).await;
        let result = self.cell.finish(attempt, Ok(self.address.clone()));
        match &result {
            Ok(address) => info!(address = %address, "Wallet connected"),
            Err(e) => warn!(error = %e, "Wallet connection failed"),
        }
        result
    }

    async fn disconnect(&self) {
        if self.cell.reset() {
            info!("Wallet disconnected");
        }
    }

    fn state(&self) -> ConnectionState {
        self.cell.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.cell.tx.subscribe()
    }
}

/// Deterministic wallet for tests: connects instantly, or fails with a fixed reason.
#[derive(Debug)]
pub struct FakeWallet {
    cell: ConnectionCell,
    outcome: Result<String, WalletError>,
}

impl FakeWallet {
    pub fn connecting_to(address: impl Into<String>) -> Self {
        Self {
            cell: ConnectionCell::new(),
            outcome: Ok(address.into()),
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            cell: ConnectionCell::new(),
            outcome: Err(WalletError::ConnectionFailed { reason: reason.into() }),
        }
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn connect(&self) -> Result<String, WalletError> {
        match self.cell.begin()? {
            ConnectStart::Started(attempt) => self.cell.finish(attempt, self.outcome.clone()),
            ConnectStart::AlreadyConnected(address) => Ok(address),
        }
    }

    async fn disconnect(&self) {
        self.cell.reset();
    }

    fn state(&self) -> ConnectionState {
        self.cell.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.cell.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_wallet_connects_and_disconnects() {
        let wallet = FakeWallet::connecting_to("GABC");
        assert_eq!(wallet.address(), Err(WalletError::NotConnected));

        assert_eq!(wallet.connect().await.unwrap(), "GABC");
        assert_eq!(wallet.address().unwrap(), "GABC");

        wallet.disconnect().await;
        assert_eq!(wallet.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_failed_connect_returns_to_disconnected() {
        let wallet = FakeWallet::failing("user rejected");
        let err = wallet.connect().await.unwrap_err();
        assert_eq!(err, WalletError::ConnectionFailed { reason: "user rejected".to_string() });
        assert_eq!(wallet.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_when_connected_returns_same_address() {
        let wallet = FakeWallet::connecting_to("GABC");
        wallet.connect().await.unwrap();
        assert_eq!(wallet.connect().await.unwrap(), "GABC");
    }
}
