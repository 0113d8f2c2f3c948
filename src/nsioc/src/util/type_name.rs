/// Reduces a full type name as returned by [`std::any::type_name`] to the
/// bare name of its outermost type.
///
/// `dyn app::service::UserService + Send` becomes `UserService` and
/// `app::repo::Repo<u8>` becomes `Repo`.
pub fn short_type_name(full: &str) -> &str {
    let name = full.trim();
    let name = name.strip_prefix("dyn ").unwrap_or(name);
    let name = name.split(" + ").next().unwrap_or(name);
    let name = name.split('<').next().unwrap_or(name);
    name.rsplit("::").next().unwrap_or(name).trim()
}
