use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, ItemFn, ReturnType};

/// Wraps a function in a `tracing` span that records its return value at trace
/// level and emits a `call` event on entry.
///
/// Arguments are forwarded to `#[tracing::instrument]`.
#[proc_macro_attribute]
pub fn trace_instrument(meta: TokenStream, input: TokenStream) -> TokenStream {
    let meta = proc_macro2::TokenStream::from(meta);
    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = parse_macro_input!(input as ItemFn);

    // `ret` needs a return value to record
    let ret = match sig.output {
        ReturnType::Default => quote! {},
        ReturnType::Type(..) => quote! { ret(level = "trace"), },
    };

    quote! {
        #[::tracing::instrument(#ret #meta)]
        #(#attrs)*
        #vis #sig {
            ::tracing::trace!("call");
            #block
        }
    }
    .into()
}
