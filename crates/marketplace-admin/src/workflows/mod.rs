pub mod bulk;
pub mod console;
pub mod validation;
pub mod verification;

#[cfg(test)]
pub(crate) mod test_support;
