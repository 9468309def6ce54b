//! # Permissions Macro
//!
//! `#[with_permission(...)]` injects a role permission check at the top of an
//! axum handler, before any of the handler's own code runs.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input,
    Expr,
    Ident,
    ItemFn,
    Token,
};

/// How multiple permissions combine
#[derive(Debug)]
enum PermissionMode {
    /// Every permission is required
    All(Vec<Expr>),
    /// One permission is enough
    Any(Vec<Expr>),
}

impl Parse for PermissionMode {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(Ident) && input.peek2(Token![=]) {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "all" => Ok(Self::All(parse_permission_list(input)?)),
                "any" => Ok(Self::Any(parse_permission_list(input)?)),
                _ => {
                    Err(syn::Error::new(
                        ident.span(),
                        "Expected 'all' or 'any' before '='",
                    ))
                },
            }
        }
        else {
            Ok(Self::All(parse_permission_list(input)?))
        }
    }
}

/// Parses a comma-separated, non-empty list of permission expressions.
fn parse_permission_list(input: ParseStream) -> syn::Result<Vec<Expr>> {
    let permissions = input.parse_terminated(Expr::parse, Token![,])?;

    if permissions.is_empty() {
        return Err(input.error("at least one permission is required"));
    }

    Ok(permissions.into_iter().collect())
}

/// Attribute macro enforcing role permissions on a handler.
///
/// # Requirements
///
/// The handler must bind two names:
/// - `state`: the server `AppState`, whose `db` backs the lookup
/// - `user`: the `AuthenticatedUser` inserted by the auth middleware
///
/// A denied check returns `403 Forbidden` naming the missing codename. A
/// failed lookup returns a generic `500`.
///
/// # Examples
///
/// ```ignore
/// #[with_permission(Permission::Customers(RecordAction::View))]
/// pub async fn list_customers(
///     State(state): State<AppState>,
///     Extension(user): Extension<AuthenticatedUser>,
/// ) -> Result<Json<Page<Customer>>> {
///     // ...
/// }
///
/// // Either permission suffices
/// #[with_permission(any = Permission::ViewAnalytics, Permission::ViewReports)]
/// pub async fn overview(
///     State(state): State<AppState>,
///     Extension(user): Extension<AuthenticatedUser>,
/// ) -> Result<Json<Overview>> {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn with_permission(args: TokenStream, input: TokenStream) -> TokenStream {
    let mode = parse_macro_input!(args as PermissionMode);
    let mut input_fn = parse_macro_input!(input as ItemFn);

    let permission_check = match mode {
        PermissionMode::All(permissions) => generate_all_permission_check(&permissions),
        PermissionMode::Any(permissions) => generate_any_permission_check(&permissions),
    };

    let original_block = input_fn.block;
    let new_block: syn::Block = syn::parse_quote! {
        {
            #permission_check
            #original_block
        }
    };
    input_fn.block = Box::new(new_block);

    quote!(#input_fn).into()
}

fn generate_all_permission_check(permissions: &[Expr]) -> proc_macro2::TokenStream {
    quote! {
        {
            let permission_service = ::auth::permissions::PermissionService::new(state.db.clone());
            for permission in [#(#permissions),*] {
                match permission_service.check_permission(&user.role, &permission).await {
                    Ok(::auth::permissions::PermissionCheckResult::Allowed) => {},
                    Ok(::auth::permissions::PermissionCheckResult::Denied) => {
                        ::tracing::debug!(user_id = %user.id, permission = %permission, "Permission denied");
                        return Err(::error::AppError::forbidden(
                            format!("Missing required permission: {}", permission)
                        ));
                    },
                    Err(e) => {
                        ::tracing::error!(error = %e, "Permission check failed");
                        return Err(::error::AppError::internal("Permission check failed"));
                    },
                }
            }
        }
    }
}

fn generate_any_permission_check(permissions: &[Expr]) -> proc_macro2::TokenStream {
    quote! {
        {
            let required = [#(#permissions),*];
            let permission_service = ::auth::permissions::PermissionService::new(state.db.clone());
            match permission_service.check_any_permission(&user.role, &required).await {
                Ok(::auth::permissions::PermissionCheckResult::Allowed) => {},
                Ok(::auth::permissions::PermissionCheckResult::Denied) => {
                    let names: Vec<String> = required.iter().map(ToString::to_string).collect();
                    return Err(::error::AppError::forbidden(
                        format!("Missing required permissions. Need at least one of: {}", names.join(", "))
                    ));
                },
                Err(e) => {
                    ::tracing::error!(error = %e, "Permission check failed");
                    return Err(::error::AppError::internal("Permission check failed"));
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_str;

    use super::*;

    #[test]
    fn test_parse_all_mode() {
        let input = "Permission::Customers(RecordAction::View), Permission::ViewAnalytics";
        let mode: PermissionMode = parse_str(input).unwrap();

        match mode {
            PermissionMode::All(perms) => assert_eq!(perms.len(), 2),
            PermissionMode::Any(_) => panic!("Expected All mode"),
        }
    }

    #[test]
    fn test_parse_any_mode() {
        let input = "any = Permission::ViewAnalytics, Permission::ViewReports";
        let mode: PermissionMode = parse_str(input).unwrap();

        match mode {
            PermissionMode::All(_) => panic!("Expected Any mode"),
            PermissionMode::Any(perms) => assert_eq!(perms.len(), 2),
        }
    }

    #[test]
    fn test_parse_trailing_comma() {
        let mode: PermissionMode = parse_str("Permission::ManageUsers,").unwrap();
        assert!(matches!(mode, PermissionMode::All(perms) if perms.len() == 1));
    }

    #[test]
    fn test_parse_unknown_mode_error() {
        assert!(parse_str::<PermissionMode>("some = Permission::ManageUsers").is_err());
    }

    #[test]
    fn test_parse_empty_permissions_error() {
        assert!(parse_str::<PermissionMode>("").is_err());
    }
}
