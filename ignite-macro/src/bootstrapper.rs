use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, spanned::Spanned, Attribute, Expr,
    ExprLit, FnArg, ImplItem, ItemImpl, Lit, LitStr, Meta, Token, Type,
};

/// Names the engine recognizes, in `HookSlot` order. `ignite` tests that
/// this table equals `HookSlot::aliases`.
const HOOK_ALIASES: [&str; 8] = [
    "ConfiguresBuilder",
    "ConfigureBuilder",
    "ConfiguresBuilderAsync",
    "ConfigureBuilderAsync",
    "DecoratesApp",
    "DecorateApp",
    "DecoratesAppAsync",
    "DecorateAppAsync",
];

struct BootstrapperArgs {
    priority: Option<Expr>,
}

impl Parse for BootstrapperArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut priority = None;

        while !input.is_empty() {
            let name: syn::Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            if name == "priority" {
                priority = Some(input.parse::<Expr>()?);
            } else {
                return Err(syn::Error::new(
                    name.span(),
                    format!("unknown bootstrapper argument `{name}`, expected `priority`"),
                ));
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(BootstrapperArgs { priority })
    }
}

pub fn bootstrapper_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as BootstrapperArgs);
    let mut item_impl = parse_macro_input!(item as ItemImpl);

    match expand(args, &mut item_impl) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(e) => {
            let error = e.to_compile_error();
            TokenStream::from(quote! {
                #error
                #item_impl
            })
        }
    }
}

fn expand(args: BootstrapperArgs, item_impl: &mut ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &item_impl.trait_ {
        return Err(syn::Error::new(
            path.span(),
            "#[bootstrapper] must be placed on an inherent impl block",
        ));
    }
    if !item_impl.generics.params.is_empty() {
        return Err(syn::Error::new(
            item_impl.generics.span(),
            "#[bootstrapper] does not support generic impl blocks",
        ));
    }

    let self_ty = item_impl.self_ty.clone();
    let type_name = match &*self_ty {
        Type::Path(type_path) if type_path.qself.is_none() => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
            .ok_or_else(|| syn::Error::new(self_ty.span(), "expected a named type"))?,
        other => {
            return Err(syn::Error::new(
                other.span(),
                "#[bootstrapper] expects an impl block for a named type",
            ))
        }
    };

    let mut hooks = Vec::new();
    for item in &mut item_impl.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let Some(explicit) = take_hook_attr(&mut method.attrs)? else {
            continue;
        };

        if let Some(FnArg::Receiver(receiver)) = method.sig.inputs.first() {
            return Err(syn::Error::new(
                receiver.span(),
                "hook methods take the phase subject as their first argument, not `self`",
            ));
        }
        if let Some(asyncness) = &method.sig.asyncness {
            return Err(syn::Error::new(
                asyncness.span(),
                "async fn hooks would borrow the subject; return `BoxFuture<'static, anyhow::Result<()>>` instead",
            ));
        }

        let ident = &method.sig.ident;
        let alias = match explicit {
            Some(lit) => {
                check_alias(&lit.value(), lit.span())?;
                lit.value()
            }
            None => {
                let derived = pascal_case(&ident.to_string());
                check_alias(&derived, ident.span())?;
                derived
            }
        };

        hooks.push(quote! {
            .method(#alias, <#self_ty>::#ident)
        });
    }

    let priority = args.priority.map(|p| quote! { .priority(#p) });

    Ok(quote! {
        #item_impl

        impl #self_ty {
            #[doc(hidden)]
            pub fn __ignite_component() -> ::ignite::bootstrap::ComponentDescriptor {
                ::ignite::bootstrap::ComponentDescriptor::new(
                    ::core::concat!(::core::module_path!(), "::", #type_name)
                )
                #priority
                #(#hooks)*
            }
        }

        ::ignite::inventory::submit! {
            ::ignite::bootstrap::Registration::new(
                ::core::concat!(::core::module_path!(), "::", #type_name),
                <#self_ty>::__ignite_component,
            )
        }
    })
}

/// Remove the `#[hook]` attribute from a method.
///
/// `Ok(None)`: not a hook. `Ok(Some(None))`: `#[hook]`. `Ok(Some(Some(name)))`:
/// `#[hook("Name")]` or `#[hook = "Name"]`.
fn take_hook_attr(attrs: &mut Vec<Attribute>) -> syn::Result<Option<Option<LitStr>>> {
    let mut found: Option<Option<LitStr>> = None;
    let mut error = None;

    attrs.retain(|attr| {
        if !attr.path().is_ident("hook") {
            return true;
        }
        if found.is_some() {
            error.get_or_insert_with(|| syn::Error::new(attr.span(), "duplicate #[hook] attribute"));
            return false;
        }

        let parsed = match &attr.meta {
            Meta::Path(_) => Ok(None),
            Meta::List(_) => attr.parse_args::<LitStr>().map(Some),
            Meta::NameValue(name_value) => match &name_value.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(lit), ..
                }) => Ok(Some(lit.clone())),
                other => Err(syn::Error::new(other.span(), "expected a string literal")),
            },
        };

        match parsed {
            Ok(name) => found = Some(name),
            Err(e) => {
                error.get_or_insert(e);
            }
        }
        false
    });

    match error {
        Some(e) => Err(e),
        None => Ok(found),
    }
}

fn check_alias(name: &str, span: proc_macro2::Span) -> syn::Result<()> {
    if HOOK_ALIASES.contains(&name) {
        return Ok(());
    }
    Err(syn::Error::new(
        span,
        format!(
            "`{name}` is not a hook name, expected one of: {}",
            HOOK_ALIASES.join(", ")
        ),
    ))
}

fn pascal_case(ident: &str) -> String {
    ident
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
