//! Hook and context names
//!
//! Names are immutable strings namespaced with colons (`config:base`,
//! `plugins:enable:{0}`). Constant names borrow a `&'static str`; names built
//! at runtime share an `Arc<str>`, so cloning is always cheap.
//!
//! Templates hold a pattern with exactly one `{0}` placeholder and produce a
//! concrete name per argument.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use steward_core::{Error, Result};

/// The only placeholder a template may contain
pub const PLACEHOLDER: &str = "{0}";

#[derive(Clone)]
enum Repr {
    Static(&'static str),
    Shared(Arc<str>),
}

impl Repr {
    fn as_str(&self) -> &str {
        match self {
            Repr::Static(s) => s,
            Repr::Shared(s) => s.as_ref(),
        }
    }
}

macro_rules! label_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name(Repr);

        impl $name {
            /// Create a name from a static string (usable in `const` items)
            #[must_use]
            pub const fn from_static(name: &'static str) -> Self {
                Self(Repr::Static(name))
            }

            /// Get the name as a string slice
            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.as_str() == other.as_str()
            }
        }

        impl Eq for $name {}

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.as_str() == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }

        // Must hash exactly like `str` so lookups through `Borrow<str>` work
        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.as_str().hash(state);
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.as_str().cmp(other.as_str())
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self.as_str(), f)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self(Repr::Shared(Arc::from(name)))
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(Repr::Shared(Arc::from(name)))
            }
        }

        impl From<Arc<str>> for $name {
            fn from(name: Arc<str>) -> Self {
                Self(Repr::Shared(name))
            }
        }

        impl From<&$name> for $name {
            fn from(name: &$name) -> Self {
                name.clone()
            }
        }
    };
}

label_type!(
    /// Concrete hook identifier, e.g. `config:base` or `env:patches:nginx`
    HookName
);

label_type!(
    /// Label marking who registered a set of hook entries, e.g. `app:myplugin`
    ContextName
);

/// Pattern producing one hook name per argument, e.g. `env:patches:{0}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookTemplate {
    pattern: &'static str,
}

impl HookTemplate {
    /// Declare a template; the pattern is validated on instantiation
    #[must_use]
    pub const fn new(pattern: &'static str) -> Self {
        Self { pattern }
    }

    /// The raw pattern
    #[must_use]
    pub const fn pattern(&self) -> &'static str {
        self.pattern
    }

    /// Substitute `arg` into the pattern
    ///
    /// This does not go through the engine's name cache; prefer
    /// [`Engine::hook_name`](crate::Engine::hook_name) on hot paths.
    pub fn instantiate(&self, arg: &str) -> Result<HookName> {
        render(self.pattern, arg).map(HookName::from)
    }
}

/// Pattern producing one context name per argument, e.g. `app:{0}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextTemplate {
    pattern: &'static str,
}

impl ContextTemplate {
    /// Declare a template; the pattern is validated on instantiation
    #[must_use]
    pub const fn new(pattern: &'static str) -> Self {
        Self { pattern }
    }

    /// The raw pattern
    #[must_use]
    pub const fn pattern(&self) -> &'static str {
        self.pattern
    }

    /// Substitute `arg` into the pattern
    pub fn instantiate(&self, arg: &str) -> Result<ContextName> {
        render(self.pattern, arg).map(ContextName::from)
    }
}

/// Substitute `arg` for the single `{0}` placeholder in `pattern`
pub(crate) fn render(pattern: &str, arg: &str) -> Result<String> {
    validate(pattern)?;
    Ok(pattern.replacen(PLACEHOLDER, arg, 1))
}

fn validate(pattern: &str) -> Result<()> {
    let mut found = 0usize;
    let mut rest = pattern;

    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            return Err(Error::invalid_template(pattern, "unclosed '{'"));
        };

        let placeholder = &after[..end];
        if placeholder != "0" {
            return Err(Error::invalid_template(
                pattern,
                format!("unsupported placeholder '{{{placeholder}}}', only '{{0}}' is allowed"),
            ));
        }

        found += 1;
        rest = &after[end + 1..];
    }

    match found {
        1 => Ok(()),
        0 => Err(Error::invalid_template(pattern, "missing '{0}' placeholder")),
        n => Err(Error::invalid_template(
            pattern,
            format!("expected exactly one '{{0}}' placeholder, found {n}"),
        )),
    }
}
