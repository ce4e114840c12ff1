//! The coordinator singleton. WASM is single-threaded, so a `thread_local!`
//! holds it; handlers clone the `Rc` before awaiting anything.

use std::cell::RefCell;
use std::rc::Rc;
use vd_app::Coordinator;

use crate::provider::BrowserProvider;

pub type App = Coordinator<BrowserProvider>;

thread_local! {
    static APP: RefCell<Option<Rc<App>>> = const { RefCell::new(None) };
}

pub fn install(app: App) -> Rc<App> {
    let app = Rc::new(app);
    APP.with(|slot| *slot.borrow_mut() = Some(app.clone()));
    app
}

pub fn app() -> Option<Rc<App>> {
    APP.with(|slot| slot.borrow().clone())
}
