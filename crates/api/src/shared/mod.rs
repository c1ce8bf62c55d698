pub mod guard;
#[cfg(test)]
pub mod test_utils;
pub mod usecase;
