use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::{quote, ToTokens};
use syn::{parse_macro_input, FnArg, ItemFn, LitInt, Pat};

/// Times a system when the `perf_stats` feature is enabled.
///
/// The body is wrapped with a drop guard that logs `[PERF] name: duration`
/// when the run exceeds the threshold (milliseconds, default 1). If one of the
/// parameters is a `Res<SimTick>` (any binding name), the guard also logs
/// every 100th tick regardless of duration.
///
/// Without the feature the guard is compiled out entirely.
///
/// ```ignore
/// #[profile(2)]
/// pub fn resolve_collisions(grid: ResMut<CollisionGrid>, tick: Res<SimTick>) { ... }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        let lit = parse_macro_input!(attr as LitInt);
        match lit.base10_parse() {
            Ok(v) => v,
            Err(e) => return e.to_compile_error().into(),
        }
    };

    let ItemFn { attrs, vis, sig, block } = input;
    let name = sig.ident.to_string();

    let tick_value = match tick_binding(&sig) {
        Some(tick) => quote! { Some(#tick.0) },
        None => quote! { None::<u64> },
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_guard = {
                struct ProfileGuard {
                    name: &'static str,
                    start: std::time::Instant,
                    tick: Option<u64>,
                }
                impl Drop for ProfileGuard {
                    fn drop(&mut self) {
                        let elapsed = self.start.elapsed();
                        let periodic = self.tick.is_some_and(|t| t % 100 == 0);
                        if elapsed.as_millis() > #threshold_ms || periodic {
                            bevy::prelude::info!("[PERF] {}: {:?}", self.name, elapsed);
                        }
                    }
                }
                ProfileGuard {
                    name: #name,
                    start: std::time::Instant::now(),
                    tick: #tick_value,
                }
            };

            #block
        }
    };

    output.into()
}

/// Finds the binding of a parameter typed as `Res<SimTick>`.
fn tick_binding(sig: &syn::Signature) -> Option<Ident> {
    sig.inputs.iter().find_map(|arg| {
        let FnArg::Typed(pat_type) = arg else { return None };
        let Pat::Ident(pat_ident) = &*pat_type.pat else { return None };
        let ty = pat_type.ty.to_token_stream().to_string();
        ty.contains("SimTick").then(|| pat_ident.ident.clone())
    })
}
