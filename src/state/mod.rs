// ============================================================================
// STATE MODULE - Gestión de estado con Rc<RefCell> + notificaciones
// ============================================================================

pub mod reactivity;

pub use reactivity::*;
