//! Lazily-built, configure-once singletons.
//!
//! A [`Holder`] owns at most one instance of a [`Singleton`] type. Options may
//! be recorded with [`Holder::configure`] until the first
//! [`Holder::instance`] call builds the value; from then on the instance is
//! fixed and further configuration is an error.
//!
//! Holders are `const`-constructible, so the same type backs both the
//! process-wide bus (a `static`) and explicit holders that callers own and
//! pass around.

use std::any::Any;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::debug;

use cyberbus_core::{BusError, BusResult};

/// Proof that a value is being built by its [`Holder`].
///
/// Only this module can create one, so [`Singleton::construct`] cannot be
/// called from anywhere else.
#[derive(Debug)]
pub struct Construction {
    _private: (),
}

/// A type whose instances are built by a [`Holder`].
pub trait Singleton: Any + Send + Sync + Sized {
    /// Options recorded by [`Holder::configure`].
    type Options: Default + Send;

    /// Reject options before [`Holder::configure`] records them.
    fn validate(_options: &Self::Options) -> BusResult<()> {
        Ok(())
    }

    fn construct(options: Self::Options, token: Construction) -> Self;
}

/// Gatekeeper for a single lazily-built instance of `T`.
pub struct Holder<T: Singleton> {
    pending: Mutex<Option<T::Options>>,
    instance: OnceLock<T>,
}

impl<T: Singleton> Holder<T> {
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(None),
            instance: OnceLock::new(),
        }
    }

    fn pending(&self) -> MutexGuard<'_, Option<T::Options>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the options the instance will be built with.
    ///
    /// Must happen before the first [`instance`](Self::instance) call. A later
    /// call replaces options recorded earlier; once the instance exists every
    /// call fails with [`BusError::ConfigurationNotAllowed`]. Options that
    /// [`Singleton::validate`] rejects are not recorded.
    pub fn configure(&self, options: T::Options) -> BusResult<&Self> {
        T::validate(&options)?;

        // Construction holds this lock, so a racing build finishes first and
        // is then seen below.
        let mut pending = self.pending();
        if self.instance.get().is_some() {
            return Err(BusError::ConfigurationNotAllowed);
        }
        *pending = Some(options);
        Ok(self)
    }

    /// The shared instance, built on first call.
    ///
    /// Concurrent first callers all get the one value built by whichever of
    /// them wins; the options are consumed exactly once.
    pub fn instance(&self) -> &T {
        if let Some(instance) = self.instance.get() {
            return instance;
        }

        let mut pending = self.pending();
        self.instance.get_or_init(|| {
            let configured = pending.is_some();
            let options = pending.take().unwrap_or_default();
            debug!(
                singleton = core::any::type_name::<T>(),
                configured, "constructing singleton"
            );
            T::construct(options, Construction { _private: () })
        })
    }

    /// The instance, if it was already built.
    pub fn get(&self) -> Option<&T> {
        self.instance.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.instance.get().is_some()
    }

    /// Whether `value` is of the type this holder builds.
    pub fn is_instance(&self, value: &dyn Any) -> bool {
        value.is::<T>()
    }
}

impl<T: Singleton> Default for Holder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> core::fmt::Debug for Holder<T>
where
    T: Singleton + core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Holder")
            .field("instance", &self.instance.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    static BUILT: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug, Default, Clone, PartialEq, Eq)]
    struct Greeting {
        text: String,
    }

    #[derive(Debug)]
    struct Greeter {
        options: Greeting,
    }

    impl Singleton for Greeter {
        type Options = Greeting;

        fn validate(options: &Greeting) -> BusResult<()> {
            if options.text.len() > 16 {
                return Err(BusError::invalid_argument("greeting too long"));
            }
            Ok(())
        }

        fn construct(options: Greeting, _token: Construction) -> Self {
            Self { options }
        }
    }

    #[derive(Debug)]
    struct Counted;

    impl Singleton for Counted {
        type Options = ();

        fn construct(_options: (), _token: Construction) -> Self {
            BUILT.fetch_add(1, Ordering::SeqCst);
            Self
        }
    }

    fn hello() -> Greeting {
        Greeting {
            text: "hello".to_string(),
        }
    }

    #[test]
    fn unconfigured_instance_uses_default_options() {
        let holder = Holder::<Greeter>::new();
        assert!(!holder.is_initialized());
        assert_eq!(holder.instance().options, Greeting::default());
        assert!(holder.is_initialized());
    }

    #[test]
    fn options_configured_first_reach_the_instance() {
        let holder = Holder::<Greeter>::new();
        let greeter = holder.configure(hello()).unwrap().instance();
        assert_eq!(greeter.options, hello());
    }

    #[test]
    fn configure_after_instance_is_rejected() {
        let holder = Holder::<Greeter>::new();
        holder.instance();

        let err = holder.configure(hello()).unwrap_err();
        assert_eq!(err, BusError::ConfigurationNotAllowed);
        assert_eq!(holder.instance().options, Greeting::default());
    }

    #[test]
    fn rejected_options_are_not_recorded() {
        let holder = Holder::<Greeter>::new();
        holder.configure(hello()).unwrap();

        let long = Greeting {
            text: "a very long greeting indeed".to_string(),
        };
        let err = holder.configure(long).unwrap_err();
        assert_eq!(err, BusError::invalid_argument("greeting too long"));
        assert_eq!(holder.instance().options, hello());
    }

    #[test]
    fn instance_is_the_same_every_time() {
        let holder = Holder::<Greeter>::new();
        assert!(holder.get().is_none());
        let first: *const Greeter = holder.instance();
        let second: *const Greeter = holder.instance();
        assert_eq!(first, second);
        assert!(std::ptr::eq(holder.get().unwrap(), first));
    }

    #[test]
    fn racing_first_access_builds_once() {
        let holder = Arc::new(Holder::<Counted>::new());
        let barrier = Arc::new(Barrier::new(16));

        let addresses: Vec<usize> = (0..16)
            .map(|_| {
                let holder = Arc::clone(&holder);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    holder.instance() as *const Counted as usize
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();

        assert_eq!(BUILT.load(Ordering::SeqCst), 1);
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn type_check_matches_only_the_wrapped_type() {
        let holder = Holder::<Greeter>::new();
        let greeter = holder.instance();

        assert!(holder.is_instance(greeter));
        assert!(!holder.is_instance(&hello()));
        assert!(!holder.is_instance(&42u8));
    }
}
