mod common;

mod api_tests;
mod dispatch_tests;
