//! Bearer-token authentication types shared by the market service and its
//! extractors: JWT claims, token issue/validate, and the axum extractor that
//! turns an `Authorization: Bearer` header into an [`agora_domain::actor::Actor`].

pub mod identity;
pub mod token;
