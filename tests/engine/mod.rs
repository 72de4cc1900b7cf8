mod tests_batch;
mod tests_cancellation;
mod tests_glr;
mod tests_incremental;
mod tests_parse;
mod tests_recovery;
mod tests_table_blob;
