pub mod static_geolocator;

pub use static_geolocator::StaticGeolocator;
