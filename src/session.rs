use anyhow::Result;

use crate::types::{SessionConfig, SessionHandle};

/// Something that hands out computing sessions.
///
/// While a session is active `acquire` is expected to return it quickly no
/// matter what arguments are passed. After `release`, the next `acquire`
/// starts a new session. How long any of this takes is up to the provider.
pub trait SessionProvider {
    /// Returns the active session, or starts one.
    ///
    /// `name` and `config` fall back to provider defaults when omitted.
    fn acquire(
        &mut self,
        name: Option<&str>,
        config: Option<SessionConfig>,
    ) -> Result<SessionHandle>;

    /// Stops the session behind `handle`.
    fn release(&mut self, handle: &SessionHandle) -> Result<()>;

    /// Configuration of the session, suitable for passing back to `acquire`.
    fn read_configuration(&self, handle: &SessionHandle) -> Result<SessionConfig>;
}

impl<P: SessionProvider + ?Sized> SessionProvider for Box<P> {
    fn acquire(
        &mut self,
        name: Option<&str>,
        config: Option<SessionConfig>,
    ) -> Result<SessionHandle> {
        (**self).acquire(name, config)
    }

    fn release(&mut self, handle: &SessionHandle) -> Result<()> {
        (**self).release(handle)
    }

    fn read_configuration(&self, handle: &SessionHandle) -> Result<SessionConfig> {
        (**self).read_configuration(handle)
    }
}
