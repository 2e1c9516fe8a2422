pub mod in_memory_record_store;
