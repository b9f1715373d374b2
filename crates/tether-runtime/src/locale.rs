#![forbid(unsafe_code)]

//! Active locale for locale-aware converters and combiners.
//!
//! Number parsing, fixed-point formatting, date-time patterns and
//! string-format combiners read the locale from the thread's
//! [`LocaleContext`] unless a converter pins its own. The context holds an
//! observable base locale plus a LIFO stack of scoped overrides.
//!
//! # Invariants
//!
//! 1. Locales are normalized: encoding and modifier suffixes are dropped,
//!    `_` becomes `-`, and `C`/`POSIX` map to `en`.
//! 2. An override is visible until its guard drops; overrides nest.
//! 3. Setting the base locale to its current value does not bump the
//!    version or notify subscribers.

use std::cell::RefCell;
use std::env;
use std::rc::Rc;

use tracing::debug;

use crate::reactive::{Observable, Subscription};
pub use tether_i18n::Locale;

/// Environment variable that overrides system locale detection.
pub const LOCALE_ENV: &str = "TETHER_LOCALE";

thread_local! {
    static GLOBAL_CONTEXT: LocaleContext = LocaleContext::system();
}

/// Locale state shared by the converters on one thread.
#[derive(Clone, Debug)]
pub struct LocaleContext {
    current: Observable<Locale>,
    overrides: Rc<RefCell<Vec<Locale>>>,
}

impl LocaleContext {
    #[must_use]
    pub fn new(locale: impl Into<Locale>) -> Self {
        let locale = normalize_locale(locale.into());
        Self {
            current: Observable::new(locale),
            overrides: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// A context initialized from [`detect_system_locale`].
    #[must_use]
    pub fn system() -> Self {
        Self::new(detect_system_locale())
    }

    /// The thread's shared context.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_CONTEXT.with(Clone::clone)
    }

    /// Active locale: the innermost override, else the base locale.
    #[must_use]
    pub fn current_locale(&self) -> Locale {
        if let Some(locale) = self.overrides.borrow().last() {
            locale.clone()
        } else {
            self.current.get()
        }
    }

    #[must_use]
    pub fn base_locale(&self) -> Locale {
        self.current.get()
    }

    pub fn set_locale(&self, locale: impl Into<Locale>) {
        let locale = normalize_locale(locale.into());
        debug!(locale = locale.as_str(), "base locale set");
        self.current.set(locale);
    }

    /// Subscribe to base locale changes.
    pub fn subscribe(&self, callback: impl Fn(&Locale) + 'static) -> Subscription {
        self.current.subscribe(callback)
    }

    /// Push a scoped override. Dropping the guard restores the prior locale.
    #[must_use = "dropping this guard clears the locale override"]
    pub fn push_override(&self, locale: impl Into<Locale>) -> LocaleOverride {
        let locale = normalize_locale(locale.into());
        self.overrides.borrow_mut().push(locale.clone());
        LocaleOverride {
            stack: Rc::clone(&self.overrides),
            locale,
        }
    }

    /// Run `f` with `locale` active.
    pub fn scoped<R>(&self, locale: impl Into<Locale>, f: impl FnOnce() -> R) -> R {
        let _guard = self.push_override(locale);
        f()
    }

    /// Version counter of the base locale.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.current.version()
    }
}

/// RAII guard for a scoped locale override.
#[must_use = "dropping this guard clears the locale override"]
pub struct LocaleOverride {
    stack: Rc<RefCell<Vec<Locale>>>,
    locale: Locale,
}

impl LocaleOverride {
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }
}

impl Drop for LocaleOverride {
    fn drop(&mut self) {
        let popped = self.stack.borrow_mut().pop();
        if let Some(popped) = popped {
            debug_assert_eq!(popped, self.locale);
        }
    }
}

/// Detect the system locale.
///
/// Preference order: `TETHER_LOCALE`, `LC_ALL`, `LANG`. Falls back to
/// `"en"`.
#[must_use]
pub fn detect_system_locale() -> Locale {
    let explicit = env::var(LOCALE_ENV).ok();
    let lc_all = env::var("LC_ALL").ok();
    let lang = env::var("LANG").ok();
    detect_locale_from(&[explicit.as_deref(), lc_all.as_deref(), lang.as_deref()])
}

/// Set the thread's base locale.
pub fn set_locale(locale: impl Into<Locale>) {
    LocaleContext::global().set_locale(locale);
}

/// The thread's active locale.
#[must_use]
pub fn current_locale() -> Locale {
    LocaleContext::global().current_locale()
}

fn normalize_locale(mut locale: Locale) -> Locale {
    normalize_locale_raw(&locale).unwrap_or_else(|| {
        locale.clear();
        locale.push_str("en");
        locale
    })
}

fn detect_locale_from(candidates: &[Option<&str>]) -> Locale {
    candidates
        .iter()
        .flatten()
        .find_map(|raw| normalize_locale_raw(raw))
        .unwrap_or_else(|| "en".to_string())
}

pub(crate) fn normalize_locale_raw(raw: &str) -> Option<Locale> {
    let raw = raw.trim();
    let raw = raw.split('@').next().unwrap_or(raw);
    let raw = raw.split('.').next().unwrap_or(raw).trim();
    if raw.is_empty() {
        return None;
    }
    let normalized = raw.replace('_', "-");
    if normalized.eq_ignore_ascii_case("c") || normalized.eq_ignore_ascii_case("posix") {
        return Some("en".to_string());
    }
    Some(normalized)
}
