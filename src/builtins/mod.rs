//! The root-scope builtin registry.
//!
//! Shaped after a primops module split by category
//! (`{list,dict,arithmetic,relational,syntax,util}.rs`) and wired together by a single
//! flat registration function; this follows the same shape, one submodule per builtin
//! category, each exposing a `register(&mut IndexMap<String, Value>)`.

pub mod args;
mod control;
mod exec;
mod http;
pub mod import;
mod io;
mod logging;
mod notify;
mod storage;
mod strings;
mod switches;
pub mod time;
mod vars;

use indexmap::IndexMap;

use crate::value::Value;

/// Builds the fixed root-scope bindings. `ScopeStack::new` merges
/// caller-supplied `scope_additions` on top of this, rejecting any that would shadow a
/// builtin.
pub fn register() -> IndexMap<String, Value> {
    let mut map = IndexMap::new();
    control::register(&mut map);
    io::register(&mut map);
    switches::register(&mut map);
    notify::register(&mut map);
    logging::register(&mut map);
    exec::register(&mut map);
    http::register(&mut map);
    import::register(&mut map);
    time::register(&mut map);
    storage::register(&mut map);
    strings::register(&mut map);
    vars::register(&mut map);
    map
}
