use criterion::{Criterion, black_box};
use std::{env, time::Duration};

use vellum_codec_manifest::{
    ConstantDef, Element, ElementBody, IntWidth, Manifest, RoutineDef, RoutineMode, StructureDef,
    TypeDescriptor, TypeField, Value, WireFormat, decode_manifest, encode_manifest,
    encode_routine_arguments,
};

/// 构造带例程、结构与常量的基准清单。
///
/// # 设计背景（Why）
/// - 基准样本要同时触发名称、字段表、嵌套描述符与常量闸门，单一空清单测不出编解码的真实成本。
fn bench_manifest() -> Manifest {
    let fields: Vec<TypeField> = (0..8)
        .map(|position| TypeField {
            index: position,
            name: format!("field{position}"),
            ty: TypeDescriptor::Uint(IntWidth::W64),
        })
        .collect();
    Manifest {
        elements: vec![
            Element {
                ptr: 0,
                deps: vec![],
                body: ElementBody::Structure(StructureDef {
                    name: String::from("Wide"),
                    fields: fields.clone(),
                }),
            },
            Element {
                ptr: 1,
                deps: vec![0],
                body: ElementBody::Routine(RoutineDef {
                    name: String::from("Store"),
                    mode: RoutineMode::Mutate,
                    accepts: fields,
                    returns: vec![],
                }),
            },
            Element {
                ptr: 2,
                deps: vec![],
                body: ElementBody::Constant(ConstantDef {
                    ty: TypeDescriptor::Text,
                    value: vec![0, 0, 0, 3, b'M', b'O', b'I'],
                }),
            },
        ],
    }
}

/// 清单两个方向的编解码成本。
///
/// # 逻辑解析（How）
/// - 编码基准包含完整性闸门；解码基准复用同一份产物字节，隔离分配噪声。
fn bench_manifest_roundtrip(c: &mut Criterion) {
    let manifest = bench_manifest();
    c.bench_function("manifest_encode_binary", |b| {
        b.iter(|| {
            let payload = encode_manifest(black_box(&manifest), WireFormat::Binary)
                .expect("基准清单合法");
            black_box(payload)
        });
    });

    let bytes = encode_manifest(&manifest, WireFormat::Binary)
        .expect("基准清单合法")
        .into_bytes()
        .expect("二进制字节");
    c.bench_function("manifest_decode_binary", |b| {
        b.iter(|| {
            let decoded =
                decode_manifest(black_box(&bytes), WireFormat::Binary).expect("产物合法");
            black_box(decoded)
        });
    });
}

/// 八参数例程的调用数据编码成本。
fn bench_calldata_encode(c: &mut Criterion) {
    let manifest = bench_manifest();
    let args: Vec<Value> = (0..8).map(|raw| Value::Uint(raw as u128)).collect();
    c.bench_function("calldata_encode", |b| {
        b.iter(|| {
            let payload = encode_routine_arguments(black_box(&manifest), "Store", &args)
                .expect("参数匹配");
            black_box(payload)
        });
    });
}

fn main() {
    let mut quick_mode = false;
    for arg in env::args().skip(1) {
        if arg == "--quick" {
            quick_mode = true;
        }
    }

    let mut criterion = Criterion::default();
    if quick_mode {
        criterion = criterion
            .sample_size(10)
            .warm_up_time(Duration::from_millis(100))
            .measurement_time(Duration::from_millis(250));
    }

    bench_manifest_roundtrip(&mut criterion);
    bench_calldata_encode(&mut criterion);
    criterion.final_summary();
}
