pub(crate) mod passhash_service;
