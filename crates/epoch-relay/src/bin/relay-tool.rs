use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use epoch_relay::{
    codec::{BlockHeader, EpochUpdate},
    merkle::MerkleTree,
};
use eyre::{eyre, Result, WrapErr};
use relay_bls::{
    hash_to_curve::try_and_increment::DIRECT_HASH_TO_G1, ParticipantMask, PrivateKey, PublicKey,
    Signature,
};
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::{
    filter::EnvFilter,
    fmt::{time::ChronoUtc, Subscriber},
};

fn main() -> Result<()> {
    Subscriber::builder()
        .with_timer(ChronoUtc::rfc3339())
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = App::new("relay-tool")
        .about("Key, signature and proof tooling for the epoch relay")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("keygen")
                .about("Generates validator keys with proofs of possession")
                .arg(
                    Arg::with_name("count")
                        .short("n")
                        .value_name("COUNT")
                        .help("Number of validators")
                        .default_value("4"),
                ),
        )
        .subcommand(
            SubCommand::with_name("sign")
                .about("Aggregate-signs a header with the given validator secrets")
                .arg(
                    Arg::with_name("header")
                        .long("header")
                        .value_name("HEX")
                        .required(true),
                )
                .arg(
                    Arg::with_name("secret")
                        .long("secret")
                        .value_name("HEX")
                        .multiple(true)
                        .number_of_values(1)
                        .required(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("merkle")
                .about("Computes the root of a leaf set and the path for one leaf")
                .arg(
                    Arg::with_name("index")
                        .long("index")
                        .value_name("INDEX")
                        .default_value("0"),
                )
                .arg(
                    Arg::with_name("leaves")
                        .value_name("LEAF_HEX")
                        .multiple(true)
                        .required(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("inspect")
                .about("Decodes a header or an epoch update payload")
                .arg(
                    Arg::with_name("header")
                        .long("header")
                        .value_name("HEX")
                        .conflicts_with("epoch-update")
                        .required_unless("epoch-update"),
                )
                .arg(
                    Arg::with_name("epoch-update")
                        .long("epoch-update")
                        .value_name("HEX"),
                ),
        )
        .get_matches();

    let output = match matches.subcommand() {
        ("keygen", Some(m)) => keygen(m)?,
        ("sign", Some(m)) => sign(m)?,
        ("merkle", Some(m)) => merkle(m)?,
        ("inspect", Some(m)) => inspect(m)?,
        (other, _) => return Err(eyre!("unknown subcommand {:?}", other)),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn decode_hex(value: &str, what: &str) -> Result<Vec<u8>> {
    hex::decode(value.trim_start_matches("0x")).wrap_err_with(|| format!("{} is not valid hex", what))
}

fn keygen(m: &ArgMatches) -> Result<Value> {
    let count: usize = m
        .value_of("count")
        .unwrap_or("4")
        .parse()
        .wrap_err("validator count must be a number")?;
    if count == 0 || count > ParticipantMask::BITS {
        return Err(eyre!("validator count must be between 1 and {}", ParticipantMask::BITS));
    }

    let rng = &mut rand::thread_rng();
    let hasher = &*DIRECT_HASH_TO_G1;
    let mut validators = Vec::with_capacity(count);
    let mut public_keys = Vec::with_capacity(count);
    for _ in 0..count {
        let sk = PrivateKey::generate(rng);
        let pk = sk.to_public();
        let pop = sk.sign_pop(hasher)?;
        validators.push(json!({
            "secret": hex::encode(sk.to_bytes()?),
            "public": hex::encode(pk.to_bytes()?),
            "pop": hex::encode(pop.to_bytes()?),
        }));
        public_keys.push(pk);
    }
    let apk = PublicKey::aggregate(&public_keys);
    info!(validators = count, "generated validator keys");
    Ok(json!({
        "validators": validators,
        "aggregated_public_key": hex::encode(apk.to_bytes()?),
    }))
}

fn sign(m: &ArgMatches) -> Result<Value> {
    let header = decode_hex(m.value_of("header").unwrap_or_default(), "header")?;
    BlockHeader::decode(&header)?;
    let secrets = m.values_of("secret").map(|v| v.collect::<Vec<_>>()).unwrap_or_default();

    let hasher = &*DIRECT_HASH_TO_G1;
    let signatures = secrets
        .iter()
        .map(|s| -> Result<Signature> {
            let sk = PrivateKey::from_bytes(&decode_hex(s, "secret")?)?;
            Ok(sk.sign(&header, &[], hasher)?)
        })
        .collect::<Result<Vec<_>>>()?;
    let asig = Signature::aggregate(&signatures);
    let mask = ParticipantMask::all(signatures.len());
    Ok(json!({
        "signature": hex::encode(asig.to_bytes()?),
        "participants": hex::encode(mask.as_bytes()),
    }))
}

fn merkle(m: &ArgMatches) -> Result<Value> {
    let index: usize = m
        .value_of("index")
        .unwrap_or("0")
        .parse()
        .wrap_err("index must be a number")?;
    let leaves = m
        .values_of("leaves")
        .map(|v| v.collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter()
        .map(|l| decode_hex(l, "leaf"))
        .collect::<Result<Vec<_>>>()?;
    let tree = MerkleTree::new(&leaves)?;
    let path = tree
        .path(index)
        .ok_or_else(|| eyre!("index {} out of range for {} leaves", index, leaves.len()))?;
    Ok(json!({
        "root": hex::encode(tree.root()),
        "path": hex::encode(path.encode()),
        "steps": path.len(),
    }))
}

fn inspect(m: &ArgMatches) -> Result<Value> {
    if let Some(header) = m.value_of("header") {
        let header = BlockHeader::decode(&decode_hex(header, "header")?)?;
        return Ok(serde_json::to_value(header)?);
    }
    let payload = m
        .value_of("epoch-update")
        .ok_or_else(|| eyre!("nothing to inspect"))?;
    let update = EpochUpdate::decode(&decode_hex(payload, "epoch update")?)?;
    Ok(serde_json::to_value(update)?)
}
