pub mod camss;
