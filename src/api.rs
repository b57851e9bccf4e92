pub mod sitemap;
pub mod swagger_main;
pub mod user;

#[cfg(test)]
pub mod test_util;
