pub mod httpv1;
