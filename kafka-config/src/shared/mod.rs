mod base;
mod connectors;
mod ingress;

pub use base::*;
pub use connectors::*;
pub use ingress::*;
