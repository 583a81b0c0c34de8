use anyhow::{ensure, Result};
use bytes::Bytes;
use kernelcheck_core::{DType, Device, Scalar, Shape, Tensor, TensorStorage};

#[test]
fn from_slice_describes_a_host_vector() -> Result<()> {
    let t = Tensor::from_slice(&[1i32, 2, 3]);
    assert_eq!(t.dtype(), DType::I32);
    assert_eq!(t.shape(), &Shape::vector(3));
    assert_eq!(t.device(), Device::Cpu);
    assert_eq!(t.byte_len(), 12);
    assert_eq!(t.to_vec::<i32>()?, vec![1, 2, 3]);
    Ok(())
}

#[test]
fn moving_to_a_device_and_back_keeps_data() -> Result<()> {
    let data = [0.5f32, -4.0, 7.25];
    let host = Tensor::from_slice(&data);
    let device = host.to(Device::Accelerator { device_id: 2 });

    assert!(matches!(
        device.storage,
        TensorStorage::Device(ref buf) if buf.device_id == 2
    ));
    ensure!(device.host_bytes().is_err(), "device tensor exposed host bytes");

    let back = device.to(Device::Cpu);
    assert_eq!(back.to_vec::<f32>()?, data.to_vec());
    Ok(())
}

#[test]
fn dtype_mismatch_on_host_conversion() {
    let t = Tensor::from_slice(&[1.0f32]);
    assert!(t.to_vec::<i32>().is_err());
}

#[test]
fn first_scalar_reads_element_zero() -> Result<()> {
    assert_eq!(Tensor::from_slice(&[9i32]).first_scalar()?, Scalar::I32(9));
    assert_eq!(Tensor::from_slice(&[49.5f32]).first_scalar()?, Scalar::F32(49.5));
    Ok(())
}

#[test]
fn host_bytes_length_is_validated() {
    let bytes = Bytes::from_static(&[0u8; 6]);
    assert!(Tensor::from_host_bytes(DType::F32, Shape::vector(2), bytes).is_err());

    let bytes = Bytes::from_static(&[0u8; 8]);
    assert!(Tensor::from_host_bytes(DType::F32, Shape::vector(2), bytes).is_ok());
}

#[test]
fn shape_display_uses_tuple_notation() {
    assert_eq!(Shape::vector(10).to_string(), "(10,)");
    assert_eq!(Shape::from_slice(&[2, 3]).to_string(), "(2, 3)");
    assert_eq!(Shape::from_slice(&[2, 3]).numel(), 6);
}

#[test]
fn zero_length_vector_has_no_elements() -> Result<()> {
    assert_eq!(Shape::vector(0).numel(), 0);
    assert_eq!(Shape::from_slice(&[]).numel(), 1);

    let empty = Tensor::from_host_bytes(DType::F32, Shape::vector(0), Bytes::new())?;
    ensure!(empty.byte_len() == 0, "empty tensor holds {} bytes", empty.byte_len());
    assert!(Tensor::from_host_bytes(DType::F32, Shape::vector(0), Bytes::from_static(&[0; 4])).is_err());
    assert!(empty.first_scalar().is_err());
    Ok(())
}
