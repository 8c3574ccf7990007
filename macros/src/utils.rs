use super::*;

/// How a field takes part in comparisons.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Mode {
    /// Identical in the shallow pass, recursive in the deep pass.
    Normal,
    /// Recursive in both passes.
    Deep,
    /// Not compared at all.
    Skip,
}

/// Parse the `#[compare(..)]` attributes of a field.
pub fn parse_mode(attrs: &[syn::Attribute]) -> Result<Mode> {
    let mut mode = Mode::Normal;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("compare")) {
        attr.parse_nested_meta(|meta| {
            let next = if meta.path.is_ident("skip") {
                Mode::Skip
            } else if meta.path.is_ident("deep") {
                Mode::Deep
            } else {
                return Err(meta.error("rememo: expected `skip` or `deep`"));
            };

            if mode != Mode::Normal && mode != next {
                return Err(meta.error("rememo: `skip` and `deep` are exclusive"));
            }

            mode = next;
            Ok(())
        })?;
    }
    Ok(mode)
}

/// Add a `Compare` bound to every type parameter.
pub fn add_bounds(mut generics: syn::Generics) -> syn::Generics {
    for param in generics.type_params_mut() {
        param.bounds.push(syn::parse_quote!(::rememo::Compare));
    }
    generics
}
