// Integration tests module

mod integration {
    mod config_test;
    mod csv_logger_test;
    mod fixture_test;
    mod pipeline_test;
}
