extern crate proc_macro;

macro_rules! bail {
    ($item:expr, $fmt:literal $($tts:tt)*) => {
        return Err(Error::new_spanned(
            &$item,
            format!(concat!("rememo: ", $fmt) $($tts)*)
        ))
    }
}

mod compare;
mod utils;

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Error, Result};

/// Derive `Compare` from a type's declared fields.
///
/// The fields are the keys of the composite: the shallow comparison checks
/// that each pair of fields is identical, the deep comparison recurses into
/// each pair. Field-less enums compare like primitives.
///
/// ```ignore
/// #[derive(Compare)]
/// struct Props {
///     title: String,
///     items: Rc<Vec<Item>>,
///     /// Compared structurally even by `shallow_equals`.
///     #[compare(deep)]
///     style: Style,
///     /// Ignored by all comparisons.
///     #[compare(skip)]
///     renders: Cell<usize>,
/// }
/// ```
#[proc_macro_derive(Compare, attributes(compare))]
pub fn derive_compare(stream: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(stream as syn::DeriveInput);
    compare::expand(&input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
