mod api;
mod callback;
mod helpers;
mod mocks;
