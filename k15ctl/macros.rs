//! Declarative macros shared across the k15ctl codebase

/// Define a fixed-width table column enum
///
/// Each variant carries its header text and a minimum cell width; the header
/// is never truncated, so the effective width is the larger of the two.
///
/// # Example
/// ```
/// use k15ctl::column_enum;
///
/// column_enum! {
///     pub enum NbColumn {
///         NbFid => "NbFid", 8,
///         NbFreq => "NbFreq", 12,
///     }
/// }
///
/// assert_eq!(NbColumn::NbFid.name(), "NbFid");
/// assert_eq!(NbColumn::NbFreq.width(), 12);
/// assert_eq!(NbColumn::all(), &[NbColumn::NbFid, NbColumn::NbFreq]);
/// ```
#[macro_export]
macro_rules! column_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $header:literal, $width:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant,)*
        }

        impl $name {
            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $header,)*
                }
            }

            pub fn width(&self) -> usize {
                let (header, width): (&str, usize) = match self {
                    $($name::$variant => ($header, $width),)*
                };
                width.max(header.len())
            }

            /// Columns in display order
            pub fn all() -> &'static [$name] {
                &[$($name::$variant,)*]
            }
        }
    };
}
