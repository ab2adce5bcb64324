use proc_macro::TokenStream;
use proc_macro2::Span;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{parse_macro_input, Ident, ItemFn, LitStr, Result, Token};

struct DashboardAttr {
    name: Option<LitStr>,
}

impl Parse for DashboardAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.is_empty() {
            return Ok(Self { name: None });
        }

        let name_key: Ident = input.parse()?;
        if name_key != "name" {
            return Err(input.error("expected `name = \"...\"`"));
        }
        input.parse::<Token![=]>()?;
        let name: LitStr = input.parse()?;
        if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
        }
        if !input.is_empty() {
            return Err(input.error("unexpected tokens"));
        }

        Ok(Self { name: Some(name) })
    }
}

/// Turn a `fn setup(app: &mut DashboardApp)` into a runnable entry point.
/// The window name defaults to the source file name and can be overridden
/// with `#[dashboard(name = "...")]`.
#[proc_macro_attribute]
pub fn dashboard(attr: TokenStream, item: TokenStream) -> TokenStream {
    let DashboardAttr { name } = parse_macro_input!(attr as DashboardAttr);
    let mut input = parse_macro_input!(item as ItemFn);
    let gridboard = gridboard_path();
    let original_ident = input.sig.ident.clone();
    let body_ident = Ident::new(
        &format!("__gridboard_{}_body", original_ident),
        Span::call_site(),
    );
    input.sig.ident = body_ident.clone();
    let vis = input.vis.clone();

    let mut setup_stmts: Vec<syn::Stmt> = Vec::new();
    if let Some(name) = name {
        setup_stmts.push(syn::parse_quote!(
            let __gridboard_owner = #gridboard::DashboardConfig::new(#name);
        ));
    } else {
        setup_stmts.push(syn::parse_quote!(let __gridboard_file = file!();));
        setup_stmts.push(syn::parse_quote!(
            let __gridboard_name = std::path::Path::new(__gridboard_file)
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or(__gridboard_file);
        ));
        setup_stmts.push(syn::parse_quote!(
            let __gridboard_owner = #gridboard::DashboardConfig::new(__gridboard_name);
        ));
    }

    let wrapper = quote! {
        #vis fn #original_ident() {
            #(#setup_stmts)*
            __gridboard_owner
                .run(|__gridboard_app| {
                    #body_ident(__gridboard_app);
                })
                .unwrap();
        }
    };

    TokenStream::from(quote! {
        #input
        #wrapper
    })
}

fn gridboard_path() -> proc_macro2::TokenStream {
    match crate_name("gridboard") {
        Ok(FoundCrate::Itself) => {
            if is_library_crate() {
                quote!(crate)
            } else {
                let ident = Ident::new(&package_name(), Span::call_site());
                quote!(::#ident)
            }
        }
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name.replace('-', "_"), Span::call_site());
            quote!(::#ident)
        }
        Err(_) => {
            let ident = Ident::new(&package_name(), Span::call_site());
            quote!(::#ident)
        }
    }
}

fn is_library_crate() -> bool {
    let crate_name = std::env::var("CARGO_CRATE_NAME").ok();
    let package_name = std::env::var("CARGO_PKG_NAME").ok();
    crate_name.is_some() && crate_name == package_name
}

fn package_name() -> String {
    std::env::var("CARGO_PKG_NAME")
        .unwrap_or_else(|_| "gridboard".to_owned())
        .replace('-', "_")
}
