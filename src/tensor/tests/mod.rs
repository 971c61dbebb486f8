mod image;
mod ops;
mod property;
