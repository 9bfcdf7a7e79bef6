//! Declarative helpers shared by the HTTP binaries.

#[cfg(feature = "actix")]
#[doc(hidden)]
pub use actix_web as __actix_web;

/// Generate a `pub fn routes(cfg: &mut ServiceConfig)` for a route module.
///
/// Two forms are accepted. A leaf module lists the handlers generated by the
/// actix attribute macros:
///
/// ```ignore
/// macros_utils::routes! {
///     route health_route,
/// }
/// ```
///
/// A parent module declares its child modules and chains their `routes`:
///
/// ```ignore
/// macros_utils::routes! {
///     load health,
///     load checks,
/// }
/// ```
#[cfg(feature = "actix")]
#[macro_export]
macro_rules! routes {
    ($(route $route:ident),+ $(,)?) => {
        pub fn routes(cfg: &mut $crate::__actix_web::web::ServiceConfig) {
            $(cfg.service($route);)+
        }
    };
    ($(load $module:ident),+ $(,)?) => {
        $(mod $module;)+

        pub fn routes(cfg: &mut $crate::__actix_web::web::ServiceConfig) {
            $($module::routes(cfg);)+
        }
    };
}
