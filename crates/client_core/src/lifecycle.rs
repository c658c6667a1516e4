//! Page lifetime tracking.
//!
//! A [`PageScope`] is created when a page mounts and cancelled when it
//! unmounts. Every network call and timer a page starts runs under its scope,
//! so a result that arrives after teardown is dropped instead of being
//! written into a page nobody is looking at.

use std::{future::Future, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::error::PageError;

#[derive(Debug, Clone, Default)]
pub struct PageScope {
    token: CancellationToken,
}

impl PageScope {
    pub fn mount() -> Self {
        Self::default()
    }

    pub fn teardown(&self) {
        self.token.cancel();
    }

    pub fn is_torn_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Fails with [`PageError::Cancelled`] once the page has been torn down.
    pub fn ensure_live(&self) -> Result<(), PageError> {
        if self.is_torn_down() {
            return Err(PageError::Cancelled);
        }
        Ok(())
    }

    /// Runs `fut` until it completes or the page is torn down, whichever
    /// happens first. Output produced after teardown is discarded.
    pub async fn guard<F, T>(&self, fut: F) -> Result<T, PageError>
    where
        F: Future<Output = T>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(PageError::Cancelled),
            out = fut => {
                if self.token.is_cancelled() {
                    Err(PageError::Cancelled)
                } else {
                    Ok(out)
                }
            }
        }
    }

    pub async fn sleep(&self, duration: Duration) -> Result<(), PageError> {
        if duration.is_zero() {
            return self.guard(std::future::ready(())).await;
        }
        self.guard(tokio::time::sleep(duration)).await
    }
}
