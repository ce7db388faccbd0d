use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::utils::Vec;
use crate::{DkgResult, Error};

/// Utility trait for serializing a protocol object to a vector of bytes.
pub trait ToBytes: CanonicalSerialize {
    /// Serialize this to a vector of bytes.
    fn to_bytes(&self) -> DkgResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.compressed_size());

        <Self as CanonicalSerialize>::serialize_compressed(self, &mut bytes)
            .map_err(|_| Error::SerializationError)?;

        Ok(bytes)
    }
}

/// Utility trait for deserializing a protocol object from a slice of bytes.
pub trait FromBytes: CanonicalDeserialize {
    /// Attempt to deserialize a `T` from a vector of bytes.
    fn from_bytes(bytes: &[u8]) -> DkgResult<Self> {
        Self::deserialize_compressed(bytes).map_err(|_| Error::DeserializationError)
    }
}

/// Utility macro for easily deriving `ToBytes` and `FromBytes` traits.
macro_rules! impl_serialization_traits {
    ($type_name:ident <$gen_param:ident>) => {
        impl<$gen_param: crate::CipherSuite> crate::ToBytes for $type_name<$gen_param> {}
        impl<$gen_param: crate::CipherSuite> crate::FromBytes for $type_name<$gen_param> {}
    };
    ($type_name:ident) => {
        impl crate::ToBytes for $type_name {}
        impl crate::FromBytes for $type_name {}
    };
}
pub(crate) use impl_serialization_traits;
