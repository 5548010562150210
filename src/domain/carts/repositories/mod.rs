//! Cart Repositories

mod carts;
mod indexes;

pub(crate) use carts::StoreCartsRepository;
pub(crate) use indexes::StoreCartIndexesRepository;
