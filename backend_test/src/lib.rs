use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one, inject dependencies,
/// and ensure that the data directory is removed regardless of how the test
/// terminates.
///
/// Each test runs a fresh server over its own temporary data directory.
/// Injectable dependencies are [`rocket::local::asynchronous::Client`] and
/// `crate::config::DataLayout`, the latter describing the test's data
/// directory.
///
/// `#[backend_test(seeded)]` starts the server over the example contest
/// document instead of an empty data directory.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract type information and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Seed the contest document if needed.
    let maybe_seed = match parse_macro_input!(args as Option<Ident>) {
        Some(arg) if arg == "seeded" => quote! {
            crate::store::ContestStore::new(layout.document())
                .save(&crate::model::document::ContestDocument::example())
                .await
                .unwrap();
        },
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected `seeded` or no argument")
                .into_compile_error()
                .into();
        }
        None => TokenStream2::new(),
    };

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// Test setup.
            async fn setup(layout: &crate::config::DataLayout) -> rocket::local::asynchronous::Client {
                #maybe_seed

                rocket::local::asynchronous::Client::tracked(crate::rocket_for_data_dir(layout.root()))
                    .await
                    .unwrap()
            }

            /// The test itself.
            #item_fn

            // This test actually enters backend code, so enable logging.
            log4rs_test_utils::test_logging::init_logging_once_for(
                ["costume_contest"],
                None,
                None,
            );

            let temp_dir = tempfile::TempDir::new().unwrap();
            let layout = crate::config::DataLayout::new(temp_dir.path());

            // Create an async runtime. We need a separate one for inside and
            // outside the `catch_unwind`.
            let outer_runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("test-setup")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();
            let inner_runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            // Run the setup.
            let rocket_client = outer_runtime.block_on(setup(&layout));

            // Run the test, catching any panics.
            // Use mutexes to safely transfer `!UnwindSafe` data.
            let client_mutex = std::sync::Mutex::new(rocket_client);
            let runtime_mutex = std::sync::Mutex::new(inner_runtime);
            let test_layout = layout.clone();
            let result = std::panic::catch_unwind(move || {
                let rocket_client = client_mutex.into_inner().unwrap();
                let runtime = runtime_mutex.into_inner().unwrap();
                let layout = test_layout;

                runtime.block_on(#new_name(#(#test_args),*));
            });

            // Run the cleanup.
            temp_dir.close().unwrap();

            // If the test panicked, re-raise the panic.
            if let Err(cause) = result {
                std::panic::panic_any(cause);
            }
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut has_layout = false;
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let Pat::Ident(_) = &*pat_type.pat {
                if let Type::Path(type_path) = &*pat_type.ty {
                    if let Some(type_ident) = type_path.path.get_ident() {
                        if type_ident == "Client" {
                            if has_client {
                                return Err(syn::Error::new(input.span(), "Test cannot accept more than one `rocket::local::asynchronous::Client`"));
                            }
                            has_client = true;
                            args.push(quote! { rocket_client });
                            continue;
                        } else if type_ident == "DataLayout" {
                            if has_layout {
                                return Err(syn::Error::new(
                                    input.span(),
                                    "Test cannot accept more than one `DataLayout`",
                                ));
                            }
                            has_layout = true;
                            args.push(quote! { layout });
                            continue;
                        }
                    }
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client` or `layout_ident: DataLayout`",
        ));
    }

    Ok(args)
}
