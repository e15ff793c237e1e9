pub mod driver;
#[cfg(test)]
pub mod memory;
