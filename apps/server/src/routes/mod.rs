macros_utils::routes! {
    load checks,
    load health,
}
