pub mod category;
pub mod insight;
pub mod session;
pub mod system;
pub mod transaction;

use crate::cli::registry::CommandRegistry;

pub fn register_all(registry: &mut CommandRegistry) {
    for entry in system::definitions()
        .into_iter()
        .chain(session::definitions())
        .chain(transaction::definitions())
        .chain(category::definitions())
        .chain(insight::definitions())
    {
        registry.register(entry);
    }
}
