//! Macro for the fixed enumerations stored in the database and sent over
//! the wire (task status, task priority).
//!
//! # Example
//!
//! ```rust
//! use projectflow_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Severity {
//!     Minor,
//!     Major,
//! }
//!
//! impl_domain_enum_conversions!(Severity {
//!     Minor => ("minor", "Minor"),
//!     Major => ("major", "Major"),
//! });
//!
//! assert_eq!(Severity::ALL.len(), 2);
//! assert_eq!(Severity::Major.as_str(), "major");
//! assert_eq!("MINOR".parse::<Severity>().unwrap(), Severity::Minor);
//! ```

/// Implements `as_str`, `display_name`, `ALL`, `Display` and `FromStr`.
///
/// Each variant maps to `(wire value, human label)`. `ALL` lists variants in
/// declaration order, which is also the order used by board views and charts.
/// Parsing is case-insensitive on the wire value.
#[macro_export]
macro_rules! impl_domain_enum_conversions {
    ($enum_name:ident { $($variant:ident => ($wire:expr, $label:expr)),+ $(,)? }) => {
        impl $enum_name {
            /// Every variant in declaration order.
            pub const ALL: &'static [$enum_name] = &[$(Self::$variant),+];

            /// Value stored in the database and used in JSON.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            /// Label shown to people.
            pub fn display_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(format!("\"{}\" is not a valid {}.", s, stringify!($enum_name))),
                }
            }
        }
    };
}
