use proc_macro::TokenStream;

mod bootstrapper;

/// Attribute macro that turns an inherent `impl` block into a bootstrap component
///
/// Methods tagged `#[hook]` become hooks. The hook name is the method name in
/// PascalCase (`configure_builder` → `ConfigureBuilder`) unless given
/// explicitly with `#[hook("DecorateAppAsync")]`. Untagged methods stay
/// ordinary associated functions.
///
/// The component is registered at link time and picked up by inventory
/// discovery under the name `module::path::Type`.
///
/// # Example
/// ```ignore
/// use ignite::prelude::*;
///
/// pub struct TokenSettings;
///
/// #[bootstrapper(priority = 20)]
/// impl TokenSettings {
///     #[hook]
///     fn configure_builder(builder: &mut AppBuilder, keys: Arc<KeyRing>) -> anyhow::Result<()> {
///         builder.container_mut().register(TokenIssuer::new(&keys));
///         Ok(())
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn bootstrapper(attr: TokenStream, item: TokenStream) -> TokenStream {
    bootstrapper::bootstrapper_attribute(attr, item)
}
