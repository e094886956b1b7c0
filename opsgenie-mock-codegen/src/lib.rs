use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote, quote_spanned};

/// Turns `fn name(server: &OpsGenieServer) { .. }` into a `#[test]` running against a fresh
/// `OpsGenieServer`, which is closed once the body returns or panics. Whatever the body returns,
/// e.g. a `Result`, is returned by the test.
///
/// An optional configuration function `fn(&mut ServerConfiguration)` can be passed as the only
/// argument of the attribute.
#[proc_macro_attribute]
pub fn opsgenie_server_test(attrs: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as syn::ItemFn);
    let args = syn::parse_macro_input!(attrs as syn::AttributeArgs);

    let attributes = &input.attrs;
    let visibility = &input.vis;
    let test_name = &input.sig.ident;
    let output_type = &input.sig.output;

    if let Err(stream) = validate_signature(&input.sig) {
        return stream.into();
    }

    let configuration_function = match args.as_slice() {
        [] => None,
        [syn::NestedMeta::Meta(syn::Meta::Path(function_path))] => Some(function_path),
        _ => {
            return quote! {
                compile_error!("The only argument should be a configuration function!");
            }
            .into();
        }
    };

    let configure = configuration_function.map(|function_path| {
        quote! {
            #function_path(&mut __opsgenie_configuration);
        }
    });

    let mut body_signature = input.sig.clone();
    body_signature.ident = format_ident!("__{}_body", test_name);
    let body_name = &body_signature.ident;
    let block = &input.block;

    let output = quote! {
        #[test]
        #(#attributes)*
        #visibility fn #test_name() #output_type {
            #body_signature #block

            #[allow(unused_mut)]
            let mut __opsgenie_configuration = opsgenie_mock::ServerConfiguration::new();
            #configure

            let __opsgenie_server = match opsgenie_mock::OpsGenieServer::with_configuration(
                __opsgenie_configuration,
            ) {
                Ok(server) => server,
                Err(e) => panic!("OpsGenie mock server error: {}", e),
            };

            let __opsgenie_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                #body_name(&__opsgenie_server)
            }));

            __opsgenie_server.close();

            match __opsgenie_result {
                Ok(output) => output,
                Err(e) => std::panic::resume_unwind(e),
            }
        }
    };

    TokenStream::from(output)
}

fn validate_signature(signature: &syn::Signature) -> Result<(), proc_macro2::TokenStream> {
    let span = signature.ident.span();

    if signature.asyncness.is_some() {
        return Err(error_at(span, "The test function can't be async!"));
    }

    if signature.inputs.len() != 1 {
        return Err(error_at(
            span,
            "The test function should take exactly one `&OpsGenieServer` argument!",
        ));
    }

    Ok(())
}

fn error_at(span: Span, message: &str) -> proc_macro2::TokenStream {
    quote_spanned! {span=>
        compile_error!(#message);
    }
}
