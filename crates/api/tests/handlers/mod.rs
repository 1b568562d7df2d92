mod admin_test;
mod middleware_test;
mod slot_requests_test;
mod slots_test;
