pub mod payments;
pub mod review;

pub async fn health() -> &'static str {
    "OK"
}
