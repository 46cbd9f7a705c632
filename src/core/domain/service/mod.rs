pub mod historic_data_fetcher;
pub(crate) mod tree_reconciler;
