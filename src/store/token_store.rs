use std::sync::Mutex;

use anyhow::{Result, anyhow};

use super::LocalStore;

/// Persisted storage of the single session token. Holds no expiry logic.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Result<Option<String>>;
    fn set(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

impl TokenStore for LocalStore {
    fn get(&self) -> Result<Option<String>> {
        Ok(self.read_state()?.token)
    }

    fn set(&self, token: &str) -> Result<()> {
        let mut st = self.read_state()?;
        st.token = Some(token.to_string());
        self.write_state(&st)
    }

    fn clear(&self) -> Result<()> {
        let mut st = self.read_state()?;
        if st.token.is_none() {
            return Ok(());
        }
        st.token = None;
        self.write_state(&st)
    }
}

/// In-process token storage, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<String>> {
        let guard = self.token.lock().map_err(|_| anyhow!("token store poisoned"))?;
        Ok(guard.clone())
    }

    fn set(&self, token: &str) -> Result<()> {
        let mut guard = self.token.lock().map_err(|_| anyhow!("token store poisoned"))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self.token.lock().map_err(|_| anyhow!("token store poisoned"))?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/store/token_store_tests.rs"]
mod tests;
