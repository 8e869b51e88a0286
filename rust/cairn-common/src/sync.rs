//! Thread-safety bounds that relax on single-threaded wasm.
//!
//! Signer futures must be `Send` on native targets so callers can move them
//! between executor threads, while browser signers built on `JsValue` can
//! never be. Bounding on [`ConditionalSend`] and [`ConditionalSync`] instead
//! of `Send` and `Sync` lets one signature serve both.

#[cfg(not(target_arch = "wasm32"))]
mod bounds {
    /// `Send` on native targets, no bound on wasm.
    pub trait ConditionalSend: Send {}
    impl<T: Send> ConditionalSend for T {}

    /// `Send + Sync` on native targets, no bound on wasm.
    pub trait ConditionalSync: Send + Sync {}
    impl<T: Send + Sync> ConditionalSync for T {}
}

#[cfg(target_arch = "wasm32")]
mod bounds {
    /// `Send` on native targets, no bound on wasm.
    pub trait ConditionalSend {}
    impl<T> ConditionalSend for T {}

    /// `Send + Sync` on native targets, no bound on wasm.
    pub trait ConditionalSync {}
    impl<T> ConditionalSync for T {}
}

pub use bounds::*;

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    fn assert_send<T: ConditionalSend>(_: &T) {}
    fn assert_sync<T: ConditionalSync>(_: &T) {}

    #[test]
    fn native_types_meet_both_bounds() {
        let value = std::sync::Arc::new(7u8);
        assert_send(&value);
        assert_sync(&value);
    }
}
